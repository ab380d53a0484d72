//! Balance provider backed by a settable table.

use crate::ports::outbound::BalanceProvider;
use async_trait::async_trait;
use futures::{future, StreamExt};
use shared_bus::LiveStream;
use shared_types::{Address, Amount, SyncResult};
use std::collections::HashMap;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    Balance {
        token: Address,
        owner: Address,
    },
    Allowance {
        token: Address,
        owner: Address,
        spender: Address,
    },
}

/// Balances and allowances set by hand. Unset entries read as `None`.
pub struct StaticBalances {
    values: watch::Sender<HashMap<Key, Amount>>,
}

impl Default for StaticBalances {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticBalances {
    pub fn new() -> Self {
        let (values, _) = watch::channel(HashMap::new());
        Self { values }
    }

    pub fn set_balance(&self, token: &Address, owner: &Address, amount: Amount) {
        self.set(
            Key::Balance {
                token: token.clone(),
                owner: owner.clone(),
            },
            amount,
        );
    }

    pub fn set_allowance(&self, token: &Address, owner: &Address, spender: &Address, amount: Amount) {
        self.set(
            Key::Allowance {
                token: token.clone(),
                owner: owner.clone(),
                spender: spender.clone(),
            },
            amount,
        );
    }

    fn set(&self, key: Key, amount: Amount) {
        self.values.send_modify(|values| {
            values.insert(key, amount);
        });
    }

    /// Current value, then every change of it.
    fn watch_key(&self, key: Key) -> LiveStream<Option<Amount>> {
        let mut last: Option<Option<Amount>> = None;
        WatchStream::new(self.values.subscribe())
            .filter_map(move |values| {
                let current = values.get(&key).copied();
                let changed = last != Some(current);
                last = Some(current);
                future::ready(changed.then_some(Ok(current)))
            })
            .boxed()
    }
}

#[async_trait]
impl BalanceProvider for StaticBalances {
    async fn balance(&self, token: &Address, owner: &Address) -> SyncResult<Option<Amount>> {
        let key = Key::Balance {
            token: token.clone(),
            owner: owner.clone(),
        };
        Ok(self.values.borrow().get(&key).copied())
    }

    fn watch_balance(&self, token: &Address, owner: &Address) -> LiveStream<Option<Amount>> {
        self.watch_key(Key::Balance {
            token: token.clone(),
            owner: owner.clone(),
        })
    }

    fn watch_allowance(
        &self,
        token: &Address,
        owner: &Address,
        spender: &Address,
    ) -> LiveStream<Option<Amount>> {
        self.watch_key(Key::Allowance {
            token: token.clone(),
            owner: owner.clone(),
            spender: spender.clone(),
        })
    }
}
