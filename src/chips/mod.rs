pub mod boolean;
pub mod one_hot;
pub mod range;
