pub const REGISTER: &str = "/auth/register";
pub const LOGIN: &str = "/auth/login";
pub const LOGOUT: &str = "/auth/logout";
pub const ME: &str = "/auth/me";

pub const USERS: &str = "/users";
pub const USERS_PENDING: &str = "/users/pending";
pub const USERS_APPROVE: &str = "/users/approve";
pub const USERS_PROMOTE: &str = "/users/promote";

pub const CARS: &str = "/cars";
pub const CATEGORIES: &str = "/categories";

pub const MEDIA: &str = "/media";
