//! Resume-to-portfolio web app: upload a resume, pick a template, publish it
//! under a slug, and serve published portfolios.

pub mod catalog;
pub mod config;
pub mod errors;
pub mod html;
pub mod models;
pub mod render;
pub mod routes;
pub mod service;
pub mod state;
pub mod viewer;
pub mod workflow;

#[cfg(test)]
mod fixtures;
