//! Basic types for the core expense module

/// Caller-supplied expense field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseField {
    /// What the money was spent on
    Description,
    /// How much was spent
    Amount,
    /// Calendar day of the expense
    Date,
    /// Free-form grouping label
    Category,
}

impl ExpenseField {
    /// Fields every payload must carry, in the order they are reported
    pub const REQUIRED: [ExpenseField; 4] = [
        ExpenseField::Description,
        ExpenseField::Amount,
        ExpenseField::Date,
        ExpenseField::Category,
    ];

    /// Name of the field on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseField::Description => "description",
            ExpenseField::Amount => "amount",
            ExpenseField::Date => "date",
            ExpenseField::Category => "category",
        }
    }
}
