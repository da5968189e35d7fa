pub mod appliances;
pub mod compare;
pub mod form;
pub mod home;
pub mod ocr;
pub mod report;
