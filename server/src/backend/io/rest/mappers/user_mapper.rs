use crate::backend::domain::commands::users::{
    PasswordChangeCommand, RegisterUserCommand, UpdateProfileCommand,
};
use crate::backend::domain::models::user::User;
use shared::{RegisterUserRequest, UpdateProfileRequest, UserListResponse, UserProfile};

/// Mapper between user DTOs and the domain `User`.
///
/// The password never leaves the domain layer.
pub struct UserMapper;

impl UserMapper {
    pub fn to_profile(user: User) -> UserProfile {
        UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            cpf: user.cpf,
            role: user.role,
            plan: user.plan,
            avatar: user.avatar,
        }
    }

    pub fn to_user_list(users: Vec<User>) -> UserListResponse {
        UserListResponse {
            users: users.into_iter().map(Self::to_profile).collect(),
        }
    }

    pub fn to_register_command(request: RegisterUserRequest) -> RegisterUserCommand {
        RegisterUserCommand {
            name: request.name,
            email: request.email,
            cpf: request.cpf,
            password: request.password,
        }
    }

    pub fn to_update_command(request: UpdateProfileRequest) -> UpdateProfileCommand {
        UpdateProfileCommand {
            name: request.name,
            email: request.email,
            cpf: request.cpf,
            avatar: request.avatar,
            password_change: request.password_change.map(|p| PasswordChangeCommand {
                current_password: p.current_password,
                new_password: p.new_password,
                confirm_password: p.confirm_password,
            }),
        }
    }
}
