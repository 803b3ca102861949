#![allow(dead_code)]

pub mod factories;
pub mod gateway;
pub mod helpers;
