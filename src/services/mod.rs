pub mod completion_service;
pub mod document_service;
pub mod generation_service;
pub mod presentation_service;
pub mod quiz_parser;
pub mod review_service;
pub mod submission_service;
