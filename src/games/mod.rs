pub mod penguins;
