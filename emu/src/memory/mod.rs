pub mod mmu;
pub mod region;
pub mod vram;
