pub mod health;
pub mod home;
pub mod login;

pub use health::health;
pub use home::home;
pub use login::{login, login_form, logout, LoginForm, LoginQuery};
