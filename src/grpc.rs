// src/grpc.rs

use std::net::SocketAddr;
use tonic::{transport::Server, Request, Response, Status};
use tracing::info;

use crate::error::{ErrorCode, ServiceError};
use crate::models::{Organization, User};
use crate::services::{OrganizationService, QueryParams, UserService};
use crate::store::Store;

pub mod proto {
    tonic::include_proto!("kbm");
}

use proto::organization_service_server::{
    OrganizationService as OrganizationRpc, OrganizationServiceServer,
};
use proto::user_service_server::{UserService as UserRpc, UserServiceServer};

impl From<ServiceError> for Status {
    fn from(e: ServiceError) -> Self {
        let message = e.to_string();
        match e.code() {
            ErrorCode::InvalidArgument => Status::invalid_argument(message),
            ErrorCode::NotFound => Status::not_found(message),
            ErrorCode::AlreadyExists => Status::already_exists(message),
            ErrorCode::Internal => Status::internal(message),
        }
    }
}

impl From<Organization> for proto::OrganizationModel {
    fn from(o: Organization) -> Self {
        Self {
            id: o.id,
            address: o.address_or_empty().to_string(),
            name: o.name,
            created_at: o.created_at,
        }
    }
}

impl From<User> for proto::UserModel {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            username: u.username,
            email: u.email,
            created_at: u.created_at,
            organization_id: u.organization_id.unwrap_or_default(),
        }
    }
}

// === Organization API ===

#[derive(Clone)]
pub struct OrganizationApi {
    service: OrganizationService,
}

#[tonic::async_trait]
impl OrganizationRpc for OrganizationApi {
    async fn create_organization(
        &self,
        request: Request<proto::CreateOrganizationRequest>,
    ) -> Result<Response<proto::CreateOrganizationResponse>, Status> {
        let req = request.into_inner();
        let organization_id = self.service.create(&req.name, &req.address).await?;
        Ok(Response::new(proto::CreateOrganizationResponse { organization_id }))
    }

    async fn get_organization(
        &self,
        request: Request<proto::GetOrganizationRequest>,
    ) -> Result<Response<proto::GetOrganizationResponse>, Status> {
        let organization = self.service.get(request.into_inner().id).await?;
        Ok(Response::new(proto::GetOrganizationResponse {
            address: organization.address_or_empty().to_string(),
            name: organization.name,
            created_at: organization.created_at,
        }))
    }

    async fn query_organizations(
        &self,
        request: Request<proto::QueryOrganizationsRequest>,
    ) -> Result<Response<proto::QueryOrganizationsResponse>, Status> {
        let req = request.into_inner();
        let params = QueryParams::new(req.query_string, req.order_by, req.page, req.page_size);
        let result = self.service.query(&params).await?;

        Ok(Response::new(proto::QueryOrganizationsResponse {
            organizations: result.items.into_iter().map(Into::into).collect(),
            page: result.page,
            page_size: result.page_size,
            total: result.total,
        }))
    }

    async fn update_organization(
        &self,
        request: Request<proto::UpdateOrganizationRequest>,
    ) -> Result<Response<proto::UpdateOrganizationResponse>, Status> {
        let req = request.into_inner();
        let message = self
            .service
            .update(req.organization_id, &req.name, &req.address)
            .await?;
        Ok(Response::new(proto::UpdateOrganizationResponse { message }))
    }

    async fn delete_organization(
        &self,
        request: Request<proto::DeleteOrganizationRequest>,
    ) -> Result<Response<proto::DeleteOrganizationResponse>, Status> {
        let message = self.service.delete(request.into_inner().organization_id).await?;
        Ok(Response::new(proto::DeleteOrganizationResponse { message }))
    }
}

// === User API ===

#[derive(Clone)]
pub struct UserApi {
    service: UserService,
}

#[tonic::async_trait]
impl UserRpc for UserApi {
    async fn create_user(
        &self,
        request: Request<proto::CreateUserRequest>,
    ) -> Result<Response<proto::CreateUserResponse>, Status> {
        let req = request.into_inner();
        let user_id = self
            .service
            .create(&req.name, &req.username, &req.email)
            .await?;
        Ok(Response::new(proto::CreateUserResponse { user_id }))
    }

    async fn get_user(
        &self,
        request: Request<proto::GetUserRequest>,
    ) -> Result<Response<proto::GetUserResponse>, Status> {
        let user = self.service.get(request.into_inner().user_id).await?;
        Ok(Response::new(proto::GetUserResponse {
            name: user.name,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            organization_id: user.organization_id.unwrap_or_default(),
        }))
    }

    async fn query_users(
        &self,
        request: Request<proto::QueryUsersRequest>,
    ) -> Result<Response<proto::QueryUsersResponse>, Status> {
        let req = request.into_inner();
        let params = QueryParams::new(req.query_string, req.order_by, req.page, req.page_size);
        let result = self.service.query(&params).await?;

        Ok(Response::new(proto::QueryUsersResponse {
            users: result.items.into_iter().map(Into::into).collect(),
            page: result.page,
            page_size: result.page_size,
            total: result.total,
        }))
    }

    async fn update_user(
        &self,
        request: Request<proto::UpdateUserRequest>,
    ) -> Result<Response<proto::UpdateUserResponse>, Status> {
        let req = request.into_inner();
        let message = self
            .service
            .update(req.user_id, &req.name, &req.username, &req.email)
            .await?;
        Ok(Response::new(proto::UpdateUserResponse { message }))
    }

    async fn delete_user(
        &self,
        request: Request<proto::DeleteUserRequest>,
    ) -> Result<Response<proto::DeleteUserResponse>, Status> {
        let message = self.service.delete(request.into_inner().user_id).await?;
        Ok(Response::new(proto::DeleteUserResponse { message }))
    }

    // Ответ всегда успешный: сбой передаётся в message
    async fn associate_user_to_organization(
        &self,
        request: Request<proto::AssociateUserToOrganizationRequest>,
    ) -> Result<Response<proto::AssociateUserToOrganizationResponse>, Status> {
        let req = request.into_inner();
        let message = self
            .service
            .associate_user_to_organization(req.user_id, req.organization_id)
            .await;
        Ok(Response::new(proto::AssociateUserToOrganizationResponse { message }))
    }

    async fn disassociate_user_from_organization(
        &self,
        request: Request<proto::DisassociateUserFromOrganizationRequest>,
    ) -> Result<Response<proto::DisassociateUserFromOrganizationResponse>, Status> {
        let message = self
            .service
            .disassociate_user_from_organization(request.into_inner().user_id)
            .await;
        Ok(Response::new(proto::DisassociateUserFromOrganizationResponse { message }))
    }
}

// === Запуск сервера ===

pub async fn run_grpc_server(
    store: Store,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = addr.parse()?;

    let organizations = OrganizationServiceServer::new(OrganizationApi {
        service: OrganizationService::new(&store),
    });
    let users = UserServiceServer::new(UserApi {
        service: UserService::new(&store),
    });

    info!(%addr, "gRPC server listening");

    Server::builder()
        .add_service(organizations)
        .add_service(users)
        .serve_with_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
