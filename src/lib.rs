pub mod buffs;
pub mod camera;
pub mod config;
pub mod consumable;
pub mod enemy;
pub mod entities;
pub mod error;
pub mod input;
pub mod inventory;
pub mod player;
pub mod render;
pub mod session;
pub mod shop;
pub mod state;
pub mod timer;
pub mod wave;
pub mod weapon;
pub mod world;
