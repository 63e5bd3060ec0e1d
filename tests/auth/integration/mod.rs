mod test_auth_middleware;
mod test_authorization;
mod test_identity_resolution;
mod test_session_flow;
mod test_token_security;
mod test_user_management;
