pub mod access;
pub mod health;
pub mod interviewers;
pub mod registrations;
pub mod selection;

#[cfg(test)]
mod tests;
