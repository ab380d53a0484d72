//! # Token
//!
//! An ERC-20 style token identified by its contract address. Indexed metadata
//! comes from the query port; balances and allowances come from the balance
//! capability; mint, transfer and approval go through the ledger.

use crate::codec;
use crate::context::Context;
use crate::entity::{Entity, EntityKind};
use crate::ports::outbound::{ActionReceipt, LedgerAction};
use gs_01_index_port::QueryBuilder;
use serde_json::Value;
use shared_bus::{once, LiveStream};
use shared_types::{Address, Amount, EntityId, SyncError, SyncResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenState {
    pub id: EntityId,
    pub address: Address,
    pub name: String,
    pub symbol: String,
    /// Owning DAO (the minter).
    pub owner: Address,
    pub total_supply: Amount,
}

pub struct TokenKind;

pub type Token = Entity<TokenKind>;

impl EntityKind for TokenKind {
    type State = TokenState;

    const NAME: &'static str = "token";

    const QUERY: QueryBuilder =
        QueryBuilder::new("tokens", &["id", "name", "symbol", "owner", "dao", "totalSupply"])
            .with_address_fields(&["id", "owner", "dao"]);

    fn decode(_ctx: &Context, raw: &Value) -> SyncResult<TokenState> {
        const E: &str = TokenKind::NAME;
        let address = codec::address(raw, "id", E)?;
        let owner = match codec::optional_address(raw, "owner", E)? {
            Some(owner) => owner,
            None => codec::address(raw, "dao", E)?,
        };
        Ok(TokenState {
            id: address.to_entity_id(),
            address,
            name: codec::optional_string(raw, "name", E)?.unwrap_or_default(),
            symbol: codec::optional_string(raw, "symbol", E)?.unwrap_or_default(),
            owner,
            total_supply: codec::amount(raw, "totalSupply", E)?,
        })
    }

    fn id_of(state: &TokenState) -> &EntityId {
        &state.id
    }
}

impl Entity<TokenKind> {
    /// Handle for the token at `address`, rejecting anything that is not an address.
    pub fn at(ctx: &Context, address: &str) -> SyncResult<Self> {
        let address = Address::parse(address)
            .map_err(|e| SyncError::invalid(TokenKind::NAME, e.to_string()))?;
        Ok(Self::from_id(ctx, address.to_entity_id()))
    }

    pub fn address(&self) -> SyncResult<Address> {
        Address::parse(self.id().as_str())
    }

    /// Live balance of `owner`; `None` until the first successful read.
    pub fn balance_of(&self, owner: &Address) -> LiveStream<Option<Amount>> {
        match (self.context().balances(), self.address()) {
            (Ok(balances), Ok(token)) => balances.watch_balance(&token, owner),
            (Err(e), _) | (_, Err(e)) => once(Err(e)),
        }
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> LiveStream<Option<Amount>> {
        match (self.context().balances(), self.address()) {
            (Ok(balances), Ok(token)) => balances.watch_allowance(&token, owner, spender),
            (Err(e), _) | (_, Err(e)) => once(Err(e)),
        }
    }

    pub async fn mint(&self, to: &Address, amount: Amount) -> SyncResult<ActionReceipt> {
        let action = LedgerAction::Mint {
            token: self.address()?,
            to: to.clone(),
            amount,
        };
        self.context().submit(action).await
    }

    pub async fn transfer(&self, to: &Address, amount: Amount) -> SyncResult<ActionReceipt> {
        let action = LedgerAction::Transfer {
            token: self.address()?,
            to: to.clone(),
            amount,
        };
        self.context().submit(action).await
    }

    /// Allow `spender` (a voting machine) to pull `amount` for staking.
    pub async fn approve_for_staking(
        &self,
        spender: &Address,
        amount: Amount,
    ) -> SyncResult<ActionReceipt> {
        let action = LedgerAction::ApproveStaking {
            token: self.address()?,
            spender: spender.clone(),
            amount,
        };
        self.context().submit(action).await
    }
}
