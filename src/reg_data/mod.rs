pub mod hmc6352;
