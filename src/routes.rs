use crate::{
    api::{self, attendance, incharge, intern, leave, performance},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::anyhow;

pub type Limit = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limits for the public intake and for the authenticated scope
pub struct RateLimits {
    pub public: Limit,
    pub protected: Limit,
}

impl RateLimits {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            public: build_limit(config.rate_public_per_min)?,
            protected: build_limit(config.rate_protected_per_min)?,
        })
    }
}

fn build_limit(requests_per_min: u32) -> anyhow::Result<Limit> {
    let per_ms = (60_000 / requests_per_min.max(1) as u64).max(1);
    GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("Invalid rate limit of {requests_per_min} requests per minute"))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limits: &RateLimits) {
    let prefix = config.api_prefix.trim_end_matches('/');

    cfg.app_data(api::json_config())
        .app_data(api::query_config())
        .app_data(api::path_config());

    cfg.service(web::resource("/health").route(web::get().to(api::health)));

    // Public intake
    cfg.service(
        web::resource(format!("{prefix}/interns/apply"))
            .wrap(Governor::new(&limits.public))
            .route(web::post().to(intern::apply)),
    );

    // Protected routes
    cfg.service(
        web::scope(prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(Governor::new(&limits.protected))
            .service(
                web::scope("/intern")
                    .service(web::resource("/profile").route(web::get().to(intern::profile)))
                    .service(
                        web::resource("/leaves")
                            .route(web::post().to(leave::apply_leave))
                            .route(web::get().to(leave::my_leaves)),
                    )
                    .service(
                        web::resource("/attendance").route(web::get().to(attendance::my_attendance)),
                    )
                    .service(
                        web::resource("/performance")
                            .route(web::get().to(performance::my_performance)),
                    ),
            )
            .service(
                web::scope("/incharge").service(
                    web::resource("/interns").route(web::get().to(intern::incharge_interns)),
                ),
            )
            .service(
                web::scope("/admin")
                    // /admin/interns
                    .service(web::resource("/interns").route(web::get().to(intern::list_interns)))
                    .service(
                        web::resource("/interns/{id}")
                            .route(web::get().to(intern::get_intern))
                            .route(web::patch().to(intern::update_intern)),
                    )
                    // /admin/leaves
                    .service(web::resource("/leaves").route(web::get().to(leave::leave_list)))
                    .service(web::resource("/leaves/{id}").route(web::get().to(leave::get_leave)))
                    .service(
                        web::resource("/leaves/{id}/approve")
                            .route(web::post().to(leave::approve_leave)),
                    )
                    .service(
                        web::resource("/leaves/{id}/reject")
                            .route(web::post().to(leave::reject_leave)),
                    )
                    // /admin/attendance
                    .service(
                        web::resource("/attendance")
                            .route(web::post().to(attendance::log_attendance)),
                    )
                    .service(
                        web::resource("/attendance/interns")
                            .route(web::get().to(attendance::intern_attendance)),
                    )
                    .service(
                        web::resource("/attendance/departments")
                            .route(web::get().to(attendance::department_attendance)),
                    )
                    // /admin/performance
                    .service(
                        web::resource("/performance/{intern_id}")
                            .route(web::post().to(performance::record_performance))
                            .route(web::get().to(performance::performance_history)),
                    )
                    .service(
                        web::resource("/performance/{intern_id}/summary")
                            .route(web::get().to(performance::performance_summary)),
                    )
                    // /admin/incharges
                    .service(
                        web::resource("/incharges")
                            .route(web::post().to(incharge::create_incharge))
                            .route(web::get().to(incharge::list_incharges)),
                    )
                    .service(
                        web::resource("/incharges/{id}")
                            .route(web::patch().to(incharge::update_incharge)),
                    ),
            ),
    );
}
