pub mod google_people;

pub use google_people::GooglePeopleClient;
