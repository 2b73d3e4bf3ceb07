//! Transaction simulation, signing and confirmation.

use crate::error::GatewayError;
use crate::rpc::HttpProvider;
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{PendingTransactionBuilder, Provider};
use alloy::rpc::types::eth::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::{Client, Http};
use everlong_domain::TxConfirmation;
use tracing::{debug, info, warn};

/// Sends contract calls over a shared HTTP provider.
///
/// Every submission blocks until the transaction is mined. A mined transaction
/// with a failed status is reported as [`GatewayError::Reverted`].
#[derive(Clone)]
pub struct TransactionSender {
    provider: HttpProvider,
}

impl TransactionSender {
    /// Creates a sender over `provider`.
    pub fn new(provider: HttpProvider) -> Self {
        Self { provider }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &HttpProvider {
        &self.provider
    }

    /// Executes a read-only `eth_call` and returns the raw return data.
    pub async fn call(
        &self,
        from: Option<Address>,
        to: Address,
        input: Bytes,
    ) -> Result<Bytes, GatewayError> {
        let mut request = TransactionRequest::default().with_to(to).with_input(input);
        if let Some(from) = from {
            request = request.with_from(from);
        }
        Ok(self.provider.call(&request).await?)
    }

    /// Signs `input` for `to` with `signer`, broadcasts it and waits for the receipt.
    pub async fn send(
        &self,
        signer: &PrivateKeySigner,
        to: Address,
        input: Bytes,
    ) -> Result<TxConfirmation, GatewayError> {
        let from = signer.address();
        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(input);

        let chain_id = self.provider.get_chain_id().await?;
        let nonce = self.provider.get_transaction_count(from).await?;
        let gas_limit = self.provider.estimate_gas(&request).await?;
        let fees = self.provider.estimate_eip1559_fees(None).await?;

        let request = request
            .with_chain_id(chain_id)
            .with_nonce(nonce)
            .with_gas_limit(gas_limit)
            .with_max_fee_per_gas(fees.max_fee_per_gas)
            .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas);

        let wallet = EthereumWallet::from(signer.clone());
        let envelope = request
            .build(&wallet)
            .await
            .map_err(|e| GatewayError::Signer(e.to_string()))?;

        debug!(from = %from, to = %to, nonce, gas_limit, "Sending transaction");
        let pending = self
            .provider
            .send_raw_transaction(&envelope.encoded_2718())
            .await?;

        self.confirm(pending).await
    }

    /// Sends an unsigned transaction from an account the node signs for,
    /// such as an anvil-impersonated account.
    pub async fn send_as_node_account(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> Result<TxConfirmation, GatewayError> {
        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(input);
        let pending = self.provider.send_transaction(request).await?;
        self.confirm(pending).await
    }

    async fn confirm(
        &self,
        pending: PendingTransactionBuilder<Http<Client>, alloy::network::Ethereum>,
    ) -> Result<TxConfirmation, GatewayError> {
        let tx_hash: TxHash = *pending.tx_hash();
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| GatewayError::Transport(format!("waiting for {tx_hash}: {e}")))?;

        let confirmation = check_receipt(tx_hash, receipt.status(), receipt.block_number)?;
        info!(tx_hash = %tx_hash, block = ?receipt.block_number, "Transaction confirmed");
        Ok(confirmation)
    }
}

/// Turns a mined receipt into a confirmation. A failed status is a revert.
fn check_receipt(
    tx_hash: TxHash,
    status: bool,
    block_number: Option<u64>,
) -> Result<TxConfirmation, GatewayError> {
    if !status {
        warn!(tx_hash = %tx_hash, "Transaction reverted on-chain");
        return Err(GatewayError::Reverted(format!(
            "transaction {tx_hash} reverted on-chain"
        )));
    }
    Ok(TxConfirmation {
        tx_hash,
        block_number,
    })
}
