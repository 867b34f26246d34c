//! Per-record funding ratio.
//!
//! The ratio is `funded_amount / loan_amount`. Anything that would make it
//! meaningless comes back as a [`RateIssue`] instead of a number, so callers
//! never see `inf`, a negative rate, or a zero standing in for "unknown".

use crate::types::LoanRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum RateIssue {
    #[error("funded_amount or loan_amount is missing")]
    MissingAmount,
    #[error("loan_amount is zero")]
    ZeroLoanAmount,
    #[error("funded_amount or loan_amount is negative")]
    NegativeAmount,
}

pub fn funding_rate(funded_amount: Option<f64>, loan_amount: Option<f64>) -> Result<f64, RateIssue> {
    let (Some(funded), Some(loan)) = (funded_amount, loan_amount) else {
        return Err(RateIssue::MissingAmount);
    };
    if funded < 0.0 || loan < 0.0 {
        return Err(RateIssue::NegativeAmount);
    }
    if loan == 0.0 {
        return Err(RateIssue::ZeroLoanAmount);
    }
    Ok(funded / loan)
}

impl LoanRecord {
    pub fn rate(&self) -> Result<f64, RateIssue> {
        funding_rate(self.funded_amount, self.loan_amount)
    }

    /// The funding rate, or `None` as the undefined-rate sentinel.
    pub fn funding_rate(&self) -> Option<f64> {
        self.rate().ok()
    }

    /// `loan_amount` when it is present and in domain.
    pub fn valid_loan_amount(&self) -> Option<f64> {
        self.loan_amount.filter(|v| *v >= 0.0)
    }
}
