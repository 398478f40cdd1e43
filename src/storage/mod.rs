pub mod herbs;
