/// # Quirks
/// Historical Chip-8 interpreters disagree on a handful of instructions.
/// Every flag defaults to `false`, which is the behaviour most modern ROMs expect.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Quirks {
    /// 8XY6/8XYE shift Vy into Vx instead of shifting Vx in place.
    pub shift_uses_vy: bool,
    /// FX55/FX65 leave I pointing past the last register transferred.
    pub load_store_increments_i: bool,
    /// DXYN clips sprites at the screen edge instead of wrapping them.
    pub clip_sprites: bool,
}
