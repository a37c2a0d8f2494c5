use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Placeholder address the node reports for shielded outputs.
pub const SHIELDED_ADDRESS: &str = "(Shielded)";

/// Wallet transaction categories as reported by `listtransactions`.
/// The enumeration is closed: an unknown category fails deserialization
/// instead of falling through to an unlabelled row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Send,
    Receive,
    Generate,
    Immature,
}

/// Coarse display bucket a transaction row is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionTone {
    Sent,
    Received,
    Pending,
}

impl TransactionKind {
    pub fn tone(self) -> TransactionTone {
        match self {
            TransactionKind::Receive | TransactionKind::Generate => TransactionTone::Received,
            TransactionKind::Send => TransactionTone::Sent,
            TransactionKind::Immature => TransactionTone::Pending,
        }
    }

    pub fn is_incoming(self) -> bool {
        match self {
            TransactionKind::Receive | TransactionKind::Generate | TransactionKind::Immature => {
                true
            }
            TransactionKind::Send => false,
        }
    }

    pub fn sign(self) -> char {
        if self.is_incoming() {
            '+'
        } else {
            '-'
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Send => "send",
            TransactionKind::Receive => "receive",
            TransactionKind::Generate => "generate",
            TransactionKind::Immature => "immature",
        }
    }

    pub fn from_category(category: &str) -> Option<Self> {
        match category {
            "send" => Some(TransactionKind::Send),
            "receive" => Some(TransactionKind::Receive),
            "generate" => Some(TransactionKind::Generate),
            "immature" => Some(TransactionKind::Immature),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub txid: String,
    pub kind: TransactionKind,
    pub address: String,
    /// Absolute amount; direction is carried by `kind`.
    pub amount: f64,
    pub confirmations: i64,
    pub confirmed: bool,
    pub time: i64,
}

impl WalletTransaction {
    pub fn is_unconfirmed(&self) -> bool {
        !self.confirmed || self.confirmations < 1 || self.address == SHIELDED_ADDRESS
    }
}

/// Presentation-ready transaction row. Strings only; the rendering layer
/// decides styling from `tone` and `unconfirmed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    pub txid: String,
    pub kind: TransactionKind,
    pub tone: TransactionTone,
    pub time: String,
    pub address: String,
    pub amount: String,
    pub fiat_amount: Option<String>,
    pub unconfirmed: bool,
}

pub fn build_transaction_row(
    transaction: &WalletTransaction,
    ticker: &str,
    fiat_price: Option<f64>,
) -> TransactionRow {
    let sign = transaction.kind.sign();
    let amount = format_amount(transaction.amount, &format!("{sign}{ticker} "));
    let fiat_amount = fiat_price
        .map(|price| format_amount(transaction.amount * price, &format!("{sign}USD $")));

    TransactionRow {
        txid: transaction.txid.clone(),
        kind: transaction.kind,
        tone: transaction.kind.tone(),
        time: format_time_of_day(transaction.time),
        address: transaction.address.clone(),
        amount,
        fiat_amount,
        unconfirmed: transaction.is_unconfirmed(),
    }
}

/// Formats a value with thousands separators, up to eight fraction digits
/// with trailing zeros trimmed, prefixed by e.g. `+ANON ` or `-USD $`.
pub fn format_amount(value: f64, prefix: &str) -> String {
    let negative = value.is_sign_negative() && value != 0.0;
    let fixed = format!("{:.8}", value.abs());
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (trimmed, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.iter().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }

    let mut out = String::with_capacity(prefix.len() + grouped.len() + 9);
    out.push_str(prefix);
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Clock-time rendering for transaction rows, e.g. `14:05 PM`.
pub fn format_time_of_day(unix_time: i64) -> String {
    DateTime::from_timestamp(unix_time, 0)
        .map(|timestamp| timestamp.format("%H:%M %p").to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default)]
pub struct TransactionsService;

impl TransactionsService {
    pub fn name(&self) -> &'static str {
        "transactions"
    }

    pub fn status(&self) -> &'static str {
        "ready"
    }
}
