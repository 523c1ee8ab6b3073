// SPDX-License-Identifier: GPL-3.0-or-later
mod broadcast;
mod jpeg;
mod mjpeg;
mod settings;

pub(crate) use broadcast::{Broadcaster, FrameSource};
pub(crate) use jpeg::{encode_jpeg, reencode_jpeg, DEFAULT_QUALITY};
pub(crate) use mjpeg::MjpegFramer;
pub(crate) use settings::StreamSettings;
