//! Stall pricing.
//!
//! Pure lookup-table arithmetic; the tables are fixed for the fair season.

use crate::application::{ElectricalOption, PitchType};

/// Flat fee added when the vendor camps on site.
pub const CAMPING_COST: u32 = 60;

/// Hire cost per table.
pub const TABLE_COST: u32 = 12;

#[must_use]
pub const fn pitch_base_cost(pitch: PitchType) -> u32 {
    match pitch {
        PitchType::StandardNoShelter => 460,
        PitchType::ExtraLargeNoShelter => 560,
        PitchType::StandardInMarquee => 480,
        PitchType::DoubleInMarquee => 940,
    }
}

/// Cost per metre of additional pitch width. Marquee pitches cannot be
/// widened, so their rate is zero.
#[must_use]
pub const fn pitch_additional_width_rate(pitch: PitchType) -> u32 {
    match pitch {
        PitchType::StandardNoShelter => 140,
        PitchType::ExtraLargeNoShelter => 150,
        PitchType::StandardInMarquee | PitchType::DoubleInMarquee => 0,
    }
}

#[must_use]
pub const fn electrical_option_cost(option: ElectricalOption) -> u32 {
    match option {
        ElectricalOption::None => 0,
        ElectricalOption::Socket13Amp | ElectricalOption::Socket16Amp => 60,
        ElectricalOption::TwinSocket13Amp => 70,
        ElectricalOption::Supply32Amp => 90,
    }
}

/// Total cost of a stall selection.
#[must_use]
pub const fn total_cost(
    pitch: PitchType,
    additional_width: u32,
    electrical: ElectricalOption,
    camping_required: bool,
    tables: u32,
) -> u32 {
    let camping = if camping_required { CAMPING_COST } else { 0 };
    pitch_base_cost(pitch)
        + pitch_additional_width_rate(pitch) * additional_width
        + electrical_option_cost(electrical)
        + camping
        + TABLE_COST * tables
}
