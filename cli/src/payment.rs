//! Payment commands: initiate, look up, and mint transaction ids.

use anyhow::Result;
use santimpay_lib::{generate_merchant_txn_id, GatewayError, PaymentRequest};

use crate::cli::Cli;
use crate::config_utils::build_client;
use crate::output::{print_payment_result, print_transaction, print_txn_id};

/// Arguments of `santimpay pay`.
pub struct PayArgs<'a> {
    pub amount: u64,
    pub reason: &'a str,
    pub phone: Option<&'a str>,
    pub id: Option<&'a str>,
}

/// Initiate a payment and print the checkout URL.
///
/// A reply below 400 without a 2xx status is printed, then reported as a
/// rejected payment so scripts see a non-zero exit.
pub fn pay_command(cli: &Cli, args: PayArgs<'_>) -> Result<()> {
    let client = build_client(cli)?;

    let mut request = PaymentRequest::new(args.amount, args.reason);
    if let Some(id) = args.id {
        request = request.with_merchant_txn_id(id);
    }
    if let Some(phone) = args.phone {
        request = request.with_phone_number(phone);
    }

    if cli.is_verbose() {
        eprintln!(
            "Initiating payment {} for {} ({})",
            request.merchant_txn_id, request.amount, request.reason
        );
    }

    let result = client.initiate_payment(
        &request.merchant_txn_id,
        request.amount,
        &request.reason,
        request.phone_number.as_deref(),
    )?;
    print_payment_result(cli, &request.merchant_txn_id, &result)?;

    if !result.is_success() {
        return Err(GatewayError::new(
            format!("Gateway did not accept the payment (HTTP {})", result.status_code),
            result.status_code,
        )
        .into());
    }
    Ok(())
}

/// Fetch and print the gateway's record for a transaction.
pub fn status_command(cli: &Cli, id: &str) -> Result<()> {
    let client = build_client(cli)?;
    let record = client.check_transaction_status(id)?;
    print_transaction(cli, &record)
}

/// Print a fresh merchant transaction id. Needs no configuration.
pub fn txn_id_command(cli: &Cli) -> Result<()> {
    print_txn_id(cli, &generate_merchant_txn_id())
}
