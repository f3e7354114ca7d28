use crate::domains::{BloodGroup, Role, UserName, UserProfile};
use crate::utils::contains_ignore_case;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    InProgress,
    Done,
    Canceled,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::InProgress => "inprogress",
            DonationStatus::Done => "done",
            DonationStatus::Canceled => "canceled",
        }
    }
}

impl TryFrom<String> for DonationStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "inprogress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "canceled" => Ok(Self::Canceled),
            other => Err(format!("{} is not a known donation status", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&UserProfile> for Donor {
    fn from(user: &UserProfile) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub requester_name: String,
    pub requester_email: String,
    pub recipient_name: String,
    pub recipient_district: String,
    pub recipient_sub_district: String,
    pub hospital_name: String,
    pub full_address: String,
    pub blood_group: BloodGroup,
    pub donation_date: NaiveDate,
    pub donation_time: NaiveTime,
    pub message: Option<String>,
    pub status: DonationStatus,
    pub donor: Option<Donor>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated recipient and schedule details supplied by the requester.
#[derive(Debug, Clone)]
pub struct DonationDetails {
    pub recipient_name: UserName,
    pub recipient_district: String,
    pub recipient_sub_district: String,
    pub hospital_name: String,
    pub full_address: String,
    pub blood_group: BloodGroup,
    pub donation_date: NaiveDate,
    pub donation_time: NaiveTime,
    pub message: Option<String>,
}

impl DonationRequest {
    pub fn new(requester: &UserProfile, details: DonationDetails) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            requester_id: requester.id,
            requester_name: requester.name.clone(),
            requester_email: requester.email.clone(),
            recipient_name: details.recipient_name.as_ref().to_owned(),
            recipient_district: details.recipient_district,
            recipient_sub_district: details.recipient_sub_district,
            hospital_name: details.hospital_name,
            full_address: details.full_address,
            blood_group: details.blood_group,
            donation_date: details.donation_date,
            donation_time: details.donation_time,
            message: details.message,
            status: DonationStatus::Pending,
            donor: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Only the requester or an admin may change or remove a request.
    pub fn is_managed_by(&self, user: &UserProfile) -> bool {
        user.role == Role::Admin || self.requester_id == user.id
    }

    pub fn accepts_donor(&self) -> bool {
        self.status == DonationStatus::Pending && self.donor.is_none()
    }

    /// Moves a pending request to `inprogress` with the donor attached.
    pub fn assign_donor(&mut self, donor: Donor) -> Result<(), String> {
        if !self.accepts_donor() {
            return Err(format!(
                "Donation request is {} and cannot take a donor",
                self.status.as_str()
            ));
        }
        self.donor = Some(donor);
        self.status = DonationStatus::InProgress;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Default)]
pub struct DonationRequestUpdate {
    pub recipient_name: Option<UserName>,
    pub recipient_district: Option<String>,
    pub recipient_sub_district: Option<String>,
    pub hospital_name: Option<String>,
    pub full_address: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub donation_date: Option<NaiveDate>,
    pub donation_time: Option<NaiveTime>,
    pub message: Option<String>,
    pub status: Option<DonationStatus>,
}

impl DonationRequestUpdate {
    /// Leaves `request` untouched when the update is refused. A request with
    /// an assigned donor cannot go back to `pending`, since `pending` with a
    /// donor would never accept another one.
    pub fn apply(self, request: &mut DonationRequest) -> Result<(), String> {
        if self.status == Some(DonationStatus::Pending) && request.donor.is_some() {
            return Err(
                "A request with an assigned donor cannot return to pending".to_string(),
            );
        }
        if let Some(recipient_name) = self.recipient_name {
            request.recipient_name = recipient_name.as_ref().to_owned();
        }
        if let Some(value) = self.recipient_district {
            request.recipient_district = value;
        }
        if let Some(value) = self.recipient_sub_district {
            request.recipient_sub_district = value;
        }
        if let Some(value) = self.hospital_name {
            request.hospital_name = value;
        }
        if let Some(value) = self.full_address {
            request.full_address = value;
        }
        if let Some(value) = self.blood_group {
            request.blood_group = value;
        }
        if let Some(value) = self.donation_date {
            request.donation_date = value;
        }
        if let Some(value) = self.donation_time {
            request.donation_time = value;
        }
        if let Some(value) = self.message {
            request.message = Some(value);
        }
        if let Some(status) = self.status {
            request.status = status;
        }
        request.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct DonationRequestFilter {
    pub status: Option<DonationStatus>,
    pub blood_group: Option<BloodGroup>,
    pub district: Option<String>,
}

impl DonationRequestFilter {
    pub fn matches(&self, request: &DonationRequest) -> bool {
        self.status.map_or(true, |status| status == request.status)
            && self
                .blood_group
                .map_or(true, |group| group == request.blood_group)
            && self.district.as_deref().map_or(true, |district| {
                contains_ignore_case(&request.recipient_district, district)
            })
    }
}
