mod run_driver;

pub use run_driver::run_driver;
