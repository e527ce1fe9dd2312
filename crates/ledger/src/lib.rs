mod chain;
mod parse;
mod record;

pub use chain::{link_digest, verify_chain, CHAIN_DIGEST_LEN};
pub use parse::{parse_ledger, ParseError};
pub use record::{InvoiceRecord, ARTICLE_LEN};
