pub mod fix;
pub mod helper;
pub mod init;
pub mod scan;
