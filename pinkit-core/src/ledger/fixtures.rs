use super::{Transaction, TransactionKind};

const FIXTURES: [(&str, u64, &str, &str, TransactionKind); 20] = [
    ("1", 10_000, "2025-02-15T12:34:56Z", "Salary", TransactionKind::Credit),
    ("2", 200, "2025-02-14T10:15:30Z", "Electricity Bill", TransactionKind::Debit),
    ("3", 300, "2025-02-14T09:20:45Z", "Water Bill", TransactionKind::Debit),
    ("4", 400, "2025-02-13T14:40:10Z", "Internet Bill", TransactionKind::Debit),
    ("5", 500, "2025-02-12T16:30:00Z", "Grocery", TransactionKind::Debit),
    ("6", 600, "2025-02-12T18:10:25Z", "Rent", TransactionKind::Debit),
    ("7", 700, "2025-02-11T11:25:50Z", "Car Loan", TransactionKind::Debit),
    ("8", 800, "2025-02-11T13:55:15Z", "Shopping", TransactionKind::Debit),
    ("9", 900, "2025-02-10T08:00:00Z", "Medical", TransactionKind::Credit),
    ("10", 1_000, "2025-02-10T09:45:30Z", "Others", TransactionKind::Debit),
    ("11", 1_100, "2025-02-09T12:20:00Z", "Insurance", TransactionKind::Credit),
    ("12", 1_200, "2025-02-09T14:35:15Z", "Shopping", TransactionKind::Debit),
    ("13", 1_300, "2025-02-08T17:45:50Z", "Dining Out", TransactionKind::Debit),
    ("14", 1_400, "2025-02-07T10:15:00Z", "Fuel", TransactionKind::Debit),
    ("15", 1_500, "2025-02-06T19:30:20Z", "Bonus", TransactionKind::Credit),
    ("16", 1_600, "2025-02-05T08:10:45Z", "Movie Tickets", TransactionKind::Debit),
    ("17", 1_700, "2025-02-05T21:00:00Z", "Hotel Booking", TransactionKind::Debit),
    ("18", 1_800, "2025-02-04T07:40:30Z", "Phone Bill", TransactionKind::Debit),
    ("19", 1_900, "2025-02-03T15:25:00Z", "Loan Payment", TransactionKind::Debit),
    ("20", 2_000, "2025-02-02T22:10:55Z", "Tax Payment", TransactionKind::Debit),
];

/// The fixed list of mock transactions shipped with the app.
#[must_use]
pub fn fixture_transactions() -> Vec<Transaction> {
    FIXTURES
        .iter()
        .map(|&(id, amount, date, description, kind)| Transaction {
            id: id.to_string(),
            amount,
            date: date.to_string(),
            description: description.to_string(),
            kind,
            category: None,
        })
        .collect()
}
