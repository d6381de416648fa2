pub mod review_digest;
