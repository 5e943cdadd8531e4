mod helpers;
mod mirror;
