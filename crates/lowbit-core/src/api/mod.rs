pub mod crop;
pub mod detect;
pub mod embed;
pub mod extract;
pub mod storage;
pub mod visual_attack;
