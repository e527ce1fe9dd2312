/// Number of ASCII digits in a valid article code.
pub const ARTICLE_LEN: usize = 10;

/// One shipment invoice line as stored in the ledger file.
///
/// `valid` is derived by chain verification and never read from disk;
/// freshly parsed records start out `valid = true` and keep that value
/// only if the whole prefix up to and including them checks out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRecord {
    pub article: String,
    pub quantity: u32,
    pub timestamp: i64,
    pub hash: String,
    pub valid: bool,
}

impl InvoiceRecord {
    pub fn new(article: String, quantity: u32, timestamp: i64, hash: String) -> Self {
        Self {
            article,
            quantity,
            timestamp,
            hash,
            valid: true,
        }
    }
}

/// Structural check for an article code: exactly [`ARTICLE_LEN`] ASCII
/// digits with a non-zero numeric value. The zero article is reserved as
/// an invalid placeholder in upstream exports and never appears in a
/// genuine ledger.
pub(crate) fn article_is_well_formed(article: &str) -> bool {
    if article.len() != ARTICLE_LEN {
        return false;
    }
    if !article.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    // 10 digits always fit in u64, so a parse failure cannot happen here;
    // the numeric check only rejects the all-zero code.
    article.parse::<u64>().map(|v| v != 0).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_article_passes() {
        assert!(article_is_well_formed("1234567890"));
        assert!(article_is_well_formed("0000000001"));
    }

    #[test]
    fn wrong_length_article_fails() {
        assert!(!article_is_well_formed("123456789"));
        assert!(!article_is_well_formed("12345678901"));
        assert!(!article_is_well_formed(""));
    }

    #[test]
    fn non_digit_article_fails() {
        assert!(!article_is_well_formed("12345678x0"));
        assert!(!article_is_well_formed("+123456789"));
        assert!(!article_is_well_formed("-123456789"));
        assert!(!article_is_well_formed("12345 7890"));
    }

    #[test]
    fn all_zero_article_fails() {
        assert!(!article_is_well_formed("0000000000"));
    }
}
