//! Ledger domain types.
//!
//! Directions, account classification, logical account roles and the
//! transaction kinds the builder knows how to post.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a ledger line.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Debit line.
    Debit,
    /// Credit line.
    Credit,
}

impl Direction {
    /// Returns the string representation stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Parses a direction from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "debit" => Some(Self::Debit),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }

    /// Returns the other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account (debit-normal).
    Asset,
    /// Liability account (credit-normal).
    Liability,
    /// Equity account (credit-normal).
    Equity,
    /// Revenue account (credit-normal).
    Revenue,
    /// Expense account (debit-normal).
    Expense,
}

impl AccountType {
    /// Returns the string representation stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Parses an account type from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "revenue" => Some(Self::Revenue),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Returns the side on which this account type normally carries its balance.
    #[must_use]
    pub const fn normal_side(self) -> Direction {
        match self {
            Self::Asset | Self::Expense => Direction::Debit,
            Self::Liability | Self::Equity | Self::Revenue => Direction::Credit,
        }
    }

    /// Calculates the balance change for a debit/credit pair.
    ///
    /// - Asset/Expense: balance += debit - credit
    /// - Liability/Equity/Revenue: balance += credit - debit
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self.normal_side() {
            Direction::Debit => debit - credit,
            Direction::Credit => credit - debit,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical account role, resolved to a concrete account per branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Cash on hand.
    Cash,
    /// Bank.
    Bank,
    /// Accounts receivable.
    AccountsReceivable,
    /// Allowance for credit losses (contra receivable).
    AllowanceForCreditLoss,
    /// VAT recoverable on purchases.
    VatReceivable,
    /// Accounts payable.
    AccountsPayable,
    /// VAT collected on sales.
    VatPayable,
    /// Refunds owed to customers.
    RefundPayable,
    /// Store credit issued to customers.
    StoreCreditLiability,
    /// Sales revenue.
    SalesRevenue,
    /// Sales returns (contra revenue).
    SalesReturns,
    /// Purchases.
    Purchases,
    /// Bad debt expense.
    BadDebtExpense,
}

impl AccountRole {
    /// Every role, in chart-of-accounts order.
    pub const ALL: [Self; 13] = [
        Self::Cash,
        Self::Bank,
        Self::AccountsReceivable,
        Self::AllowanceForCreditLoss,
        Self::VatReceivable,
        Self::AccountsPayable,
        Self::VatPayable,
        Self::RefundPayable,
        Self::StoreCreditLiability,
        Self::SalesRevenue,
        Self::SalesReturns,
        Self::Purchases,
        Self::BadDebtExpense,
    ];

    /// Returns the key used in settings overrides.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::AccountsReceivable => "accounts_receivable",
            Self::AllowanceForCreditLoss => "allowance_for_credit_loss",
            Self::VatReceivable => "vat_receivable",
            Self::AccountsPayable => "accounts_payable",
            Self::VatPayable => "vat_payable",
            Self::RefundPayable => "refund_payable",
            Self::StoreCreditLiability => "store_credit_liability",
            Self::SalesRevenue => "sales_revenue",
            Self::SalesReturns => "sales_returns",
            Self::Purchases => "purchases",
            Self::BadDebtExpense => "bad_debt_expense",
        }
    }

    /// Parses a role from its settings key.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.key() == s)
    }

    /// Default account code used when creating the account on demand.
    #[must_use]
    pub const fn default_code(self) -> &'static str {
        match self {
            Self::Cash => "1000",
            Self::Bank => "1010",
            Self::AccountsReceivable => "1100",
            Self::AllowanceForCreditLoss => "1150",
            Self::VatReceivable => "1200",
            Self::AccountsPayable => "2000",
            Self::VatPayable => "2100",
            Self::RefundPayable => "2200",
            Self::StoreCreditLiability => "2300",
            Self::SalesRevenue => "4000",
            Self::SalesReturns => "4100",
            Self::Purchases => "5000",
            Self::BadDebtExpense => "6100",
        }
    }

    /// Default account name.
    #[must_use]
    pub const fn default_name(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Bank => "Bank",
            Self::AccountsReceivable => "Accounts Receivable",
            Self::AllowanceForCreditLoss => "Allowance for Credit Losses",
            Self::VatReceivable => "VAT Receivable",
            Self::AccountsPayable => "Accounts Payable",
            Self::VatPayable => "VAT Payable",
            Self::RefundPayable => "Refund Payable",
            Self::StoreCreditLiability => "Store Credit Liability",
            Self::SalesRevenue => "Sales Revenue",
            Self::SalesReturns => "Sales Returns",
            Self::Purchases => "Purchases",
            Self::BadDebtExpense => "Bad Debt Expense",
        }
    }

    /// Account type of the default account.
    #[must_use]
    pub const fn account_type(self) -> AccountType {
        match self {
            Self::Cash
            | Self::Bank
            | Self::AccountsReceivable
            | Self::AllowanceForCreditLoss
            | Self::VatReceivable => AccountType::Asset,
            Self::AccountsPayable
            | Self::VatPayable
            | Self::RefundPayable
            | Self::StoreCreditLiability => AccountType::Liability,
            Self::SalesRevenue | Self::SalesReturns => AccountType::Revenue,
            Self::Purchases | Self::BadDebtExpense => AccountType::Expense,
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Kind of business event a ledger transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Point-of-sale sale.
    Sale,
    /// Sales invoice.
    Invoice,
    /// Purchase from a supplier.
    Purchase,
    /// Credit note approval (sales return).
    CreditNote,
    /// Refund settlement of a credit note.
    Refund,
    /// Expected-credit-loss provision adjustment.
    EclProvision,
}

impl TransactionKind {
    /// Returns the string representation stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Invoice => "invoice",
            Self::Purchase => "purchase",
            Self::CreditNote => "credit_note",
            Self::Refund => "refund",
            Self::EclProvision => "ecl_provision",
        }
    }

    /// Parses a kind from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sale" => Some(Self::Sale),
            "invoice" => Some(Self::Invoice),
            "purchase" => Some(Self::Purchase),
            "credit_note" => Some(Self::CreditNote),
            "refund" => Some(Self::Refund),
            "ecl_provision" => Some(Self::EclProvision),
            _ => None,
        }
    }

    /// Origin tag stamped on every line of this kind.
    #[must_use]
    pub const fn origin(self) -> LineOrigin {
        match self {
            Self::Sale => LineOrigin::PosAuto,
            Self::Invoice => LineOrigin::Invoice,
            Self::Purchase => LineOrigin::Purchase,
            Self::CreditNote => LineOrigin::CreditNote,
            Self::Refund => LineOrigin::Refund,
            Self::EclProvision => LineOrigin::EclProvision,
        }
    }

    /// Book the transaction is recorded in.
    #[must_use]
    pub const fn journal(self) -> &'static str {
        match self {
            Self::Sale | Self::Invoice => "Sales Journal",
            Self::Purchase => "Purchases Journal",
            Self::CreditNote => "Sales Returns Journal",
            Self::Refund => "Cash Disbursements Journal",
            Self::EclProvision => "General Journal",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origin tag carried by each ledger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineOrigin {
    /// Automatic POS posting.
    PosAuto,
    /// Invoice posting.
    Invoice,
    /// Purchase posting.
    Purchase,
    /// Credit note approval.
    CreditNote,
    /// Refund settlement.
    Refund,
    /// Credit-loss provision.
    EclProvision,
}

impl LineOrigin {
    /// Returns the string representation stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PosAuto => "POS_AUTO",
            Self::Invoice => "INVOICE",
            Self::Purchase => "PURCHASE",
            Self::CreditNote => "CREDIT_NOTE",
            Self::Refund => "REFUND",
            Self::EclProvision => "ECL_PROVISION",
        }
    }

    /// Parses an origin tag.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "POS_AUTO" => Some(Self::PosAuto),
            "INVOICE" => Some(Self::Invoice),
            "PURCHASE" => Some(Self::Purchase),
            "CREDIT_NOTE" => Some(Self::CreditNote),
            "REFUND" => Some(Self::Refund),
            "ECL_PROVISION" => Some(Self::EclProvision),
            _ => None,
        }
    }
}

impl fmt::Display for LineOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a source document was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    /// Paid in cash.
    Cash,
    /// Paid through the bank.
    Bank,
    /// On account (receivable or payable).
    Credit,
}

impl PaymentMode {
    /// Returns the string representation stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::Credit => "credit",
        }
    }

    /// Parses a payment mode.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "bank" => Some(Self::Bank),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }

    /// Account settled by a sale or invoice paid this way.
    #[must_use]
    pub const fn receipt_role(self) -> AccountRole {
        match self {
            Self::Cash => AccountRole::Cash,
            Self::Bank => AccountRole::Bank,
            Self::Credit => AccountRole::AccountsReceivable,
        }
    }

    /// Account settled by a purchase paid this way.
    #[must_use]
    pub const fn payment_role(self) -> AccountRole {
        match self {
            Self::Cash => AccountRole::Cash,
            Self::Bank => AccountRole::Bank,
            Self::Credit => AccountRole::AccountsPayable,
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(AccountType::Asset, dec!(100), dec!(30), dec!(70))]
    #[case(AccountType::Expense, dec!(100), dec!(30), dec!(70))]
    #[case(AccountType::Liability, dec!(100), dec!(30), dec!(-70))]
    #[case(AccountType::Revenue, dec!(0), dec!(1000), dec!(1000))]
    #[case(AccountType::Equity, dec!(50), dec!(50), dec!(0))]
    fn test_balance_change_follows_normal_side(
        #[case] account_type: AccountType,
        #[case] debit: Decimal,
        #[case] credit: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(account_type.balance_change(debit, credit), expected);
    }

    #[test]
    fn test_role_keys_round_trip() {
        for role in AccountRole::ALL {
            assert_eq!(AccountRole::parse(role.key()), Some(role));
        }
        assert_eq!(AccountRole::parse("petty_cash"), None);
    }

    #[test]
    fn test_default_codes_are_unique() {
        let mut codes: Vec<&str> = AccountRole::ALL.iter().map(|r| r.default_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), AccountRole::ALL.len());
    }

    #[test]
    fn test_kind_origin_tags() {
        assert_eq!(TransactionKind::Sale.origin().as_str(), "POS_AUTO");
        assert_eq!(TransactionKind::Invoice.origin().as_str(), "INVOICE");
        assert_eq!(TransactionKind::Purchase.origin().as_str(), "PURCHASE");
        assert_eq!(TransactionKind::CreditNote.origin().as_str(), "CREDIT_NOTE");
        assert_eq!(TransactionKind::Refund.origin().as_str(), "REFUND");
        assert_eq!(
            TransactionKind::EclProvision.origin().as_str(),
            "ECL_PROVISION"
        );
        assert_eq!(LineOrigin::parse("POS_AUTO"), Some(LineOrigin::PosAuto));
    }

    #[rstest]
    #[case(PaymentMode::Cash, AccountRole::Cash, AccountRole::Cash)]
    #[case(PaymentMode::Bank, AccountRole::Bank, AccountRole::Bank)]
    #[case(
        PaymentMode::Credit,
        AccountRole::AccountsReceivable,
        AccountRole::AccountsPayable
    )]
    fn test_payment_mode_roles(
        #[case] mode: PaymentMode,
        #[case] receipt: AccountRole,
        #[case] payment: AccountRole,
    ) {
        assert_eq!(mode.receipt_role(), receipt);
        assert_eq!(mode.payment_role(), payment);
    }

    #[test]
    fn test_parse_is_case_insensitive_for_direction() {
        assert_eq!(Direction::parse("DEBIT"), Some(Direction::Debit));
        assert_eq!(Direction::parse("credit"), Some(Direction::Credit));
        assert_eq!(Direction::parse("both"), None);
        assert_eq!(Direction::Debit.opposite(), Direction::Credit);
    }
}
