pub mod stakeholder;
