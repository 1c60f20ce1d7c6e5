pub mod controller;
pub mod entity;
pub mod form;
pub mod infra;
pub mod repository;
pub mod service;
pub mod usecase;
pub mod validator;
