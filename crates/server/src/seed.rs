//! Startup seeding of the default admin and sample posts.
//!
//! Idempotent: the admin is only created if missing, and sample posts only
//! when the blog table is empty.

use chrono::{Duration, Utc};
use tracing::info;

use crate::auth::{AuthManager, Credentials};
use crate::error::Result;
use crate::models::{PostInput, Role};
use crate::store::PostStore;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// (slug, title, content, tags, age in days)
const SAMPLE_POSTS: [(&str, &str, &str, &str, i64); 3] = [
    (
        "getting-started-spring-boot-nextjs",
        "Getting Started with Spring Boot and Next.js",
        "# Building a Modern Portfolio\n\nThis is a sample blog post demonstrating the power of **Spring Boot** and **Next.js**.\n\n## Why this stack?\n\n1. Type Safety with TypeScript\n2. Robust Backend with Java\n3. Great SEO with Next.js\n\nEnjoy the new site!",
        "java,springboot,nextjs,fullstack",
        2,
    ),
    (
        "art-of-clean-code",
        "The Art of Clean Code",
        "# Clean Code Principles\n\n> \"Clean code always looks like it was written by someone who cares.\"\n\nIn this post, we explore meaningful names, small functions, and S.O.L.I.D principles.",
        "coding,best-practices,clean-code",
        1,
    ),
    (
        "why-i-love-framer-motion",
        "Why I Love Framer Motion",
        "# Animations Made Easy\n\nFramer Motion allows us to create complex animations with declarative syntax.\n\n```jsx\n<motion.div animate={{ x: 100 }} />\n```\n\nIt makes the UI feel alive!",
        "frontend,animation,react",
        0,
    ),
];

pub async fn seed_defaults(auth: &AuthManager, posts: &dyn PostStore) -> Result<()> {
    if !auth.user_exists(DEFAULT_ADMIN_USERNAME).await? {
        auth.create_user(
            &Credentials::new(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD),
            Role::Admin,
        )
        .await?;
        info!("[Seed] Admin user seeded: {}", DEFAULT_ADMIN_USERNAME);
    }

    if posts.count().await? == 0 {
        let now = Utc::now();
        for (slug, title, content, tags, age_days) in SAMPLE_POSTS {
            let input = PostInput::new(title, content).with_tags(tags).published(true);
            posts.insert(slug, &input, now - Duration::days(age_days)).await?;
        }
        info!("[Seed] {} sample blog posts seeded", SAMPLE_POSTS.len());
    }

    Ok(())
}
