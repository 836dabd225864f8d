//! Record builders for seeding test scenarios

use chartdash_core::database::models::ContributionStatus;
use chartdash_core::database::repositories::{
    CampaignRepository, ContributionRepository, MembershipRepository, NewCampaign,
    NewContribution, NewMembership, NewPledge, PledgeRepository,
};
use chartdash_core::database::{Database, models::time_text};
use chartdash_core::Result;
use chrono::NaiveDateTime;

/// Builder for contribution records
pub struct ContributionBuilder {
    contact_id: i64,
    campaign_id: Option<i64>,
    recurring_id: Option<i64>,
    amount: f64,
    receive_date: NaiveDateTime,
    status: ContributionStatus,
}

impl ContributionBuilder {
    /// Create a builder for a completed gift from one donor
    pub fn new(contact_id: i64, amount: f64) -> Self {
        Self {
            contact_id,
            campaign_id: None,
            recurring_id: None,
            amount,
            receive_date: time_text::now(),
            status: ContributionStatus::Completed,
        }
    }

    /// Set the receive date
    pub fn received_at(mut self, when: NaiveDateTime) -> Self {
        self.receive_date = when;
        self
    }

    /// Attribute the gift to a campaign
    pub fn for_campaign(mut self, campaign_id: i64) -> Self {
        self.campaign_id = Some(campaign_id);
        self
    }

    /// Link the gift to a recurring agreement
    pub fn recurring(mut self, recurring_id: i64) -> Self {
        self.recurring_id = Some(recurring_id);
        self
    }

    /// Set a non-completed status
    pub fn with_status(mut self, status: ContributionStatus) -> Self {
        self.status = status;
        self
    }

    /// Insert the contribution, returning its row id
    pub async fn insert(self, db: &Database) -> Result<i64> {
        ContributionRepository::new(db.pool().clone())
            .insert(&NewContribution {
                contact_id: self.contact_id,
                campaign_id: self.campaign_id,
                recurring_id: self.recurring_id,
                total_amount: self.amount,
                receive_date: self.receive_date,
                status: self.status,
            })
            .await
    }
}

/// Builder for campaign records
pub struct CampaignBuilder {
    title: String,
    goal_amount: f64,
    start_date: NaiveDateTime,
    end_date: Option<NaiveDateTime>,
    is_active: bool,
}

impl CampaignBuilder {
    /// Create a builder for an active, open-ended campaign
    pub fn new(title: &str, goal_amount: f64) -> Self {
        Self {
            title: title.to_string(),
            goal_amount,
            start_date: time_text::now(),
            end_date: None,
            is_active: true,
        }
    }

    /// Set the start date
    pub fn started_at(mut self, when: NaiveDateTime) -> Self {
        self.start_date = when;
        self
    }

    /// Set an end date
    pub fn ends_at(mut self, when: NaiveDateTime) -> Self {
        self.end_date = Some(when);
        self
    }

    /// Mark the campaign inactive
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Insert the campaign, returning its row id
    pub async fn insert(self, db: &Database) -> Result<i64> {
        CampaignRepository::new(db.pool().clone())
            .insert(&NewCampaign {
                title: self.title,
                goal_amount: self.goal_amount,
                start_date: self.start_date,
                end_date: self.end_date,
                is_active: self.is_active,
            })
            .await
    }
}

/// Builder for pledges with optional fulfilling payments
pub struct PledgeBuilder {
    contact_id: i64,
    amount: f64,
    create_date: NaiveDateTime,
    payments: Vec<f64>,
}

impl PledgeBuilder {
    /// Create a builder for an unfulfilled pledge
    pub fn new(contact_id: i64, amount: f64) -> Self {
        Self {
            contact_id,
            amount,
            create_date: time_text::now(),
            payments: Vec::new(),
        }
    }

    /// Set the pledge creation date
    pub fn created_at(mut self, when: NaiveDateTime) -> Self {
        self.create_date = when;
        self
    }

    /// Add a completed payment installment
    pub fn with_payment(mut self, amount: f64) -> Self {
        self.payments.push(amount);
        self
    }

    /// Insert the pledge and any payments, returning the pledge row id
    pub async fn insert(self, db: &Database) -> Result<i64> {
        let pledges = PledgeRepository::new(db.pool().clone());
        let contributions = ContributionRepository::new(db.pool().clone());

        let pledge_id = pledges
            .insert(&NewPledge {
                contact_id: self.contact_id,
                amount: self.amount,
                create_date: self.create_date,
            })
            .await?;

        for amount in self.payments {
            let contribution_id = contributions
                .insert(&NewContribution {
                    contact_id: self.contact_id,
                    campaign_id: None,
                    recurring_id: None,
                    total_amount: amount,
                    receive_date: self.create_date,
                    status: ContributionStatus::Completed,
                })
                .await?;
            pledges.add_payment(pledge_id, contribution_id).await?;
        }

        Ok(pledge_id)
    }
}

/// Builder for memberships with an optional joining fee
pub struct MembershipBuilder {
    contact_id: i64,
    type_name: String,
    start_date: NaiveDateTime,
    fee: Option<f64>,
}

impl MembershipBuilder {
    /// Create a builder for a membership of the named type
    pub fn new(contact_id: i64, type_name: &str) -> Self {
        Self {
            contact_id,
            type_name: type_name.to_string(),
            start_date: time_text::now(),
            fee: None,
        }
    }

    /// Set the membership start date
    pub fn started_at(mut self, when: NaiveDateTime) -> Self {
        self.start_date = when;
        self
    }

    /// Record a completed fee contribution linked as the membership payment
    pub fn with_fee(mut self, amount: f64) -> Self {
        self.fee = Some(amount);
        self
    }

    /// Insert the membership (and fee, if any), returning the membership id
    pub async fn insert(self, db: &Database) -> Result<i64> {
        let memberships = MembershipRepository::new(db.pool().clone());
        let contributions = ContributionRepository::new(db.pool().clone());

        let type_id = memberships.ensure_type(&self.type_name).await?;
        let membership_id = memberships
            .insert(&NewMembership {
                contact_id: self.contact_id,
                membership_type_id: type_id,
                start_date: self.start_date,
            })
            .await?;

        if let Some(fee) = self.fee {
            let contribution_id = contributions
                .insert(&NewContribution {
                    contact_id: self.contact_id,
                    campaign_id: None,
                    recurring_id: None,
                    total_amount: fee,
                    receive_date: self.start_date,
                    status: ContributionStatus::Completed,
                })
                .await?;
            memberships
                .add_payment(membership_id, contribution_id)
                .await?;
        }

        Ok(membership_id)
    }
}
