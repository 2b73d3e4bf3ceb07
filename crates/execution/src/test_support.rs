//! In-memory chain used by the keeper tests.

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use everlong_domain::{KeeperAction, TxConfirmation, VaultTarget};
use everlong_protocols::{GatewayError, KeeperCall, KeeperContract, VaultManager, VaultReader};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Read(KeeperAction, VaultTarget),
    Simulate(KeeperAction, VaultTarget),
    Submit(KeeperAction, VaultTarget),
}

#[derive(Default)]
struct State {
    vaults: Vec<Address>,
    queues: HashMap<Address, Vec<Address>>,
    predicates: HashSet<(KeeperAction, Address)>,
    list_failure: Option<GatewayError>,
    read_failures: HashSet<(KeeperAction, Address)>,
    simulate_failures: HashMap<(KeeperAction, Address), GatewayError>,
    submit_failures: HashMap<(KeeperAction, Address), GatewayError>,
    log: Vec<Recorded>,
    discoveries: Vec<Instant>,
    next_block: u64,
}

/// Fake gateway. Vaults are keyed by address; strategies by their vault.
#[derive(Default)]
pub struct FakeChain {
    state: Mutex<State>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a vault whose default queue starts with `strategy`.
    pub fn with_vault(self, vault: Address, strategy: Address) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.vaults.push(vault);
            state.queues.insert(vault, vec![strategy]);
        }
        self
    }

    /// Registers a vault with an empty default queue.
    pub fn with_empty_vault(self, vault: Address) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.vaults.push(vault);
            state.queues.insert(vault, Vec::new());
        }
        self
    }

    pub fn needs(self, action: KeeperAction, vault: Address) -> Self {
        self.state
            .lock()
            .unwrap()
            .predicates
            .insert((action, vault));
        self
    }

    pub fn failing_list(self, err: GatewayError) -> Self {
        self.state.lock().unwrap().list_failure = Some(err);
        self
    }

    pub fn failing_read(self, action: KeeperAction, vault: Address) -> Self {
        self.state
            .lock()
            .unwrap()
            .read_failures
            .insert((action, vault));
        self
    }

    pub fn failing_simulation(self, action: KeeperAction, vault: Address, err: GatewayError) -> Self {
        self.state
            .lock()
            .unwrap()
            .simulate_failures
            .insert((action, vault), err);
        self
    }

    pub fn failing_submit(self, action: KeeperAction, vault: Address, err: GatewayError) -> Self {
        self.state
            .lock()
            .unwrap()
            .submit_failures
            .insert((action, vault), err);
        self
    }

    pub fn log(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn submissions(&self) -> Vec<(KeeperAction, VaultTarget)> {
        self.log()
            .into_iter()
            .filter_map(|entry| match entry {
                Recorded::Submit(action, target) => Some((action, target)),
                _ => None,
            })
            .collect()
    }

    /// Instants at which the vault set was listed, one per tick.
    pub fn discoveries(&self) -> Vec<Instant> {
        self.state.lock().unwrap().discoveries.clone()
    }
}

#[async_trait]
impl VaultManager for FakeChain {
    async fn list_vaults(&self) -> Result<Vec<Address>, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.discoveries.push(Instant::now());
        match &state.list_failure {
            Some(err) => Err(err.clone()),
            None => Ok(state.vaults.clone()),
        }
    }
}

#[async_trait]
impl VaultReader for FakeChain {
    async fn default_queue(&self, vault: Address) -> Result<Vec<Address>, GatewayError> {
        let state = self.state.lock().unwrap();
        state
            .queues
            .get(&vault)
            .cloned()
            .ok_or_else(|| GatewayError::Reverted(format!("unknown vault {vault}")))
    }
}

#[async_trait]
impl KeeperContract for FakeChain {
    async fn should(
        &self,
        action: KeeperAction,
        target: &VaultTarget,
    ) -> Result<bool, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.log.push(Recorded::Read(action, *target));
        if state.read_failures.contains(&(action, target.vault)) {
            return Err(GatewayError::Transport("connection reset".into()));
        }
        Ok(state.predicates.contains(&(action, target.vault)))
    }

    async fn simulate(&self, call: &KeeperCall) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.log.push(Recorded::Simulate(call.action, call.target));
        match state.simulate_failures.get(&(call.action, call.target.vault)) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn submit(&self, call: &KeeperCall) -> Result<TxConfirmation, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.log.push(Recorded::Submit(call.action, call.target));
        if let Some(err) = state.submit_failures.get(&(call.action, call.target.vault)) {
            return Err(err.clone());
        }
        state.next_block += 1;
        Ok(TxConfirmation {
            tx_hash: TxHash::with_last_byte(state.next_block as u8),
            block_number: Some(state.next_block),
        })
    }
}

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}
