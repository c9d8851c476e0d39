pub mod bluetooth;
pub mod console;
pub mod logging;
pub mod shutdown;
