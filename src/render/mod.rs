// SPDX-License-Identifier: GPL-3.0-or-later
pub(crate) mod color;
pub(crate) mod color_map;
pub(crate) mod resize;
mod settings;
mod thermal;

pub(crate) use settings::RenderSettings;
pub(crate) use thermal::ThermalRenderer;
