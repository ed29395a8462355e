// Copyright 2020 @TwoCookingMice

pub mod bounds;
pub mod constants;
pub mod ray;
pub mod spectrum;
pub mod warp;
