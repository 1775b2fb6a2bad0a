// Decompilation pipeline phases, in execution order

#[path = "01_unpack.rs"]
pub mod unpack;
#[path = "02_convert.rs"]
pub mod convert;
#[path = "03_decompile.rs"]
pub mod decompile;
#[path = "04_normalize.rs"]
pub mod normalize;
#[path = "05_assemble.rs"]
pub mod assemble;
