use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use csv::{Reader, StringRecord, Terminator, WriterBuilder};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use shared::{PaymentMethod, Transaction};
use std::fs::File;
use std::io::BufReader;
use std::str::FromStr;

use super::connection::CsvConnection;
use super::write_atomically;
use crate::domain::money::plain_amount;
use crate::storage::traits::TransactionStorage;

const HEADER: [&str; 7] = [
    "id",
    "employee_id",
    "date",
    "amount",
    "commission",
    "payment_method",
    "service_label",
];

/// CSV-based transaction repository
#[derive(Clone)]
pub struct TransactionRepository {
    connection: CsvConnection,
}

impl TransactionRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read all transactions from the CSV file, in file order
    fn read_transactions(&self) -> Result<Vec<Transaction>> {
        let file_path = self.connection.transactions_file_path();
        if !file_path.exists() {
            debug!("No transactions file at {:?}", file_path);
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)
            .with_context(|| format!("Failed to open {:?}", file_path))?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut transactions = Vec::new();
        for (index, result) in csv_reader.records().enumerate() {
            let record = result?;
            // Line 1 is the header
            let transaction = parse_record(&record).with_context(|| {
                format!("Invalid transaction on line {} of {:?}", index + 2, file_path)
            })?;
            transactions.push(transaction);
        }

        Ok(transactions)
    }

    /// Write all transactions to the CSV file
    fn write_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        let mut csv_writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        csv_writer.write_record(HEADER)?;

        for transaction in transactions {
            csv_writer.write_record([
                transaction.id.as_str(),
                transaction.employee_id.as_str(),
                transaction.date.format("%Y-%m-%d").to_string().as_str(),
                plain_amount(transaction.amount).as_str(),
                plain_amount(transaction.commission).as_str(),
                transaction.payment_method.code(),
                transaction.service_label.as_str(),
            ])?;
        }

        let bytes = csv_writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush transactions: {}", e))?;
        let file_path = self.connection.transactions_file_path();
        write_atomically(&file_path, &bytes)?;

        debug!("Wrote {} transactions to {:?}", transactions.len(), file_path);
        Ok(())
    }
}

fn field<'a>(record: &'a StringRecord, index: usize) -> Result<&'a str> {
    record
        .get(index)
        .ok_or_else(|| anyhow!("missing column '{}'", HEADER[index]))
}

fn parse_decimal(record: &StringRecord, index: usize) -> Result<Decimal> {
    let raw = field(record, index)?;
    Decimal::from_str(raw.trim()).with_context(|| format!("invalid {} '{}'", HEADER[index], raw))
}

fn parse_record(record: &StringRecord) -> Result<Transaction> {
    let raw_date = field(record, 2)?;
    let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}'", raw_date))?;
    let payment_method =
        PaymentMethod::from_code(field(record, 5)?.trim()).map_err(|e| anyhow!(e))?;

    Ok(Transaction {
        id: field(record, 0)?.to_string(),
        employee_id: field(record, 1)?.to_string(),
        date,
        amount: parse_decimal(record, 3)?,
        commission: parse_decimal(record, 4)?,
        payment_method,
        service_label: field(record, 6)?.to_string(),
    })
}

impl TransactionStorage for TransactionRepository {
    fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.read_transactions()
    }

    fn store_transaction(&self, transaction: &Transaction) -> Result<()> {
        let mut transactions = self.read_transactions()?;
        if transactions.iter().any(|t| t.id == transaction.id) {
            return Err(anyhow!("Transaction {} is already stored", transaction.id));
        }
        transactions.insert(0, transaction.clone());
        self.write_transactions(&transactions)?;
        info!("Stored transaction {}", transaction.id);
        Ok(())
    }

    fn delete_transaction(&self, transaction_id: &str) -> Result<bool> {
        let mut transactions = self.read_transactions()?;
        let before = transactions.len();
        transactions.retain(|t| t.id != transaction_id);

        if transactions.len() == before {
            warn!("Transaction {} not found in storage", transaction_id);
            return Ok(false);
        }

        self.write_transactions(&transactions)?;
        info!("Deleted transaction {} from storage", transaction_id);
        Ok(true)
    }

    fn replace_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        self.write_transactions(transactions)?;
        info!("Replaced stored transactions ({} total)", transactions.len());
        Ok(())
    }
}
