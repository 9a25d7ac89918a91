pub mod candidate;
pub mod job_offer;
pub mod matching;
