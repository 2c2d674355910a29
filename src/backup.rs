// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Whole-ledger JSON backup and restore, plus a flat CSV of transactions.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::{LedgerRows, Storage};
use crate::error::{Error, Result};
use crate::models::{Account, Category, IncomeConfig, Settings, Transaction};
use crate::store::{validate_transaction, LedgerStore};

pub const EXPORT_VERSION: &str = "1.0";

fn default_version() -> String {
    EXPORT_VERSION.to_string()
}

/// Any missing collection reads as empty. `incomeConfigs` and `settings`
/// stay `None` when absent so import can leave the stored ones alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_configs: Option<Vec<IncomeConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default = "default_version")]
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub accounts: usize,
    pub categories: usize,
    pub transactions: usize,
    pub income_configs: Option<usize>,
}

pub fn export_data<S: Storage>(store: &LedgerStore<S>) -> ExportDocument {
    ExportDocument {
        accounts: store.accounts().to_vec(),
        transactions: store.transactions().to_vec(),
        categories: store.categories().to_vec(),
        income_configs: Some(store.income_configs().to_vec()),
        settings: store.settings().cloned(),
        exported_at: Some(store.now()),
        version: EXPORT_VERSION.to_string(),
    }
}

pub fn export_json<S: Storage>(store: &LedgerStore<S>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&export_data(store))?)
}

pub fn export_to_file<S: Storage>(store: &LedgerStore<S>, path: &Path) -> Result<()> {
    let doc = export_data(store);
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut w, &doc)?;
    w.flush()?;
    info!(
        path = %path.display(),
        transactions = doc.transactions.len(),
        "ledger exported"
    );
    Ok(())
}

/// Checks the document before anything is deleted.
pub fn parse_document(json: &str) -> Result<ExportDocument> {
    let doc: ExportDocument =
        serde_json::from_str(json).map_err(|e| Error::Import(format!("unreadable backup: {}", e)))?;
    if !doc.version.starts_with("1.") {
        return Err(Error::Import(format!(
            "unsupported backup version '{}'",
            doc.version
        )));
    }
    for t in &doc.transactions {
        validate_transaction(t)
            .map_err(|e| Error::Import(format!("transaction '{}': {}", t.id, e)))?;
    }
    Ok(doc)
}

/// Replaces accounts, categories and transactions (and income configs and
/// settings when the document has them) with the document's contents.
pub fn import_data<S: Storage>(store: &mut LedgerStore<S>, json: &str) -> Result<ImportSummary> {
    let doc = store.track("import", parse_document(json))?;
    store.replace_ledger(LedgerRows {
        accounts: &doc.accounts,
        categories: &doc.categories,
        transactions: &doc.transactions,
        income_configs: doc.income_configs.as_deref(),
        settings: doc.settings.as_ref(),
    })?;
    let summary = ImportSummary {
        accounts: doc.accounts.len(),
        categories: doc.categories.len(),
        transactions: doc.transactions.len(),
        income_configs: doc.income_configs.as_ref().map(Vec::len),
    };
    info!(?summary, "ledger imported");
    Ok(summary)
}

pub fn import_from_file<S: Storage>(
    store: &mut LedgerStore<S>,
    path: &Path,
) -> Result<ImportSummary> {
    let mut json = String::new();
    BufReader::new(File::open(path)?).read_to_string(&mut json)?;
    import_data(store, &json)
}

/// Oldest first; account and category columns carry names.
pub fn export_transactions_csv<S: Storage, W: Write>(
    store: &LedgerStore<S>,
    writer: W,
) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "date",
        "type",
        "account",
        "to_account",
        "category",
        "amount",
        "note",
    ])?;
    let account_name = |id: &str| {
        store
            .account(id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| id.to_string())
    };
    let mut rows: Vec<&Transaction> = store.transactions().iter().collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.timestamp.cmp(&b.timestamp)));
    for t in &rows {
        wtr.write_record([
            t.date.to_string(),
            t.r#type.to_string(),
            account_name(&t.account_id),
            t.to_account_id
                .as_deref()
                .map(account_name)
                .unwrap_or_default(),
            t.category_id
                .as_deref()
                .map(|c| store.category(c).map_or(c.to_string(), |cat| cat.name.clone()))
                .unwrap_or_default(),
            t.amount.to_string(),
            t.note.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_collections_read_as_empty() {
        let doc = parse_document(r#"{"version":"1.0"}"#).unwrap();
        assert!(doc.accounts.is_empty());
        assert!(doc.transactions.is_empty());
        assert!(doc.income_configs.is_none());
        assert!(doc.settings.is_none());
    }

    #[test]
    fn numeric_amounts_are_accepted() {
        let json = r#"{
            "accounts": [{
                "id": "pnc", "name": "PNC Spending", "type": "checking",
                "startingBalance": 810.63, "startingDate": "2025-11-01",
                "createdAt": "2025-11-01T00:00:00Z", "updatedAt": "2025-11-01T00:00:00Z"
            }]
        }"#;
        let doc = parse_document(json).unwrap();
        assert_eq!(doc.accounts[0].starting_balance.to_string(), "810.63");
        assert_eq!(doc.version, "1.0");
    }

    #[test]
    fn rejects_garbage_and_unknown_versions() {
        assert!(matches!(parse_document("not json"), Err(Error::Import(_))));
        assert!(matches!(
            parse_document(r#"{"version":"2.0"}"#),
            Err(Error::Import(_))
        ));
    }

    #[test]
    fn rejects_self_transfer() {
        let json = r#"{
            "transactions": [{
                "id": "t1", "amount": "5", "type": "transfer",
                "accountId": "pnc", "toAccountId": "pnc",
                "date": "2025-11-07", "timestamp": "2025-11-07T12:00:00Z",
                "createdAt": "2025-11-07T12:00:00Z", "updatedAt": "2025-11-07T12:00:00Z"
            }]
        }"#;
        assert!(matches!(parse_document(json), Err(Error::Import(_))));
    }
}
