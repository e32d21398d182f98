mod parameters;
mod properties;
