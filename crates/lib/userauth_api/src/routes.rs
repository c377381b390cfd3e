//! Route paths.

pub const POST_USER_SIGN_UP: &str = "/user/signUp";
pub const POST_USER_LOGIN: &str = "/user/login";
pub const POST_USER_REFRESH: &str = "/user/refresh";
pub const GET_USER_ME: &str = "/user/me";
