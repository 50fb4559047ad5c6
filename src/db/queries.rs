use anyhow::Context;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{
    BlockedPeriod, Booking, BookingStatus, PaymentStatus, RecurrenceKind, RecurringDetails,
    Service, ServiceKind,
};

// `%.f` writes nothing for whole seconds, so older rows still parse and
// text order still matches time order.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const BOOKING_COLUMNS: &str = "id, customer_id, staff_id, service_id, resource_id, start_at, end_at, \
     pickup_location, status, payment_status, google_event_id, group_size, participants, \
     recurring_group_id, recurring_type, recurring_count";

fn format_dt(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

fn parse_dt(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .with_context(|| format!("invalid stored timestamp: {s}"))
}

// ── Bookings ──

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    let participants = booking
        .participants
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let recurring = booking.recurring_details.as_ref();

    conn.execute(
        &format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
        ),
        params![
            booking.id,
            booking.customer_id,
            booking.staff_id,
            booking.service_id,
            booking.resource_id,
            format_dt(&booking.start),
            format_dt(&booking.end),
            booking.pickup_location,
            booking.status.as_str(),
            booking.payment_status.as_str(),
            booking.google_event_id,
            booking.group_size,
            participants,
            recurring.map(|r| r.group_id.as_str()),
            recurring.map(|r| r.kind.as_str()),
            recurring.map(|r| r.count),
        ],
    )?;
    Ok(())
}

/// Returns false when no booking has this id.
pub fn update_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<bool> {
    let participants = booking
        .participants
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let recurring = booking.recurring_details.as_ref();

    let count = conn.execute(
        "UPDATE bookings SET customer_id = ?2, staff_id = ?3, service_id = ?4, resource_id = ?5,
           start_at = ?6, end_at = ?7, pickup_location = ?8, status = ?9, payment_status = ?10,
           google_event_id = ?11, group_size = ?12, participants = ?13,
           recurring_group_id = ?14, recurring_type = ?15, recurring_count = ?16
         WHERE id = ?1",
        params![
            booking.id,
            booking.customer_id,
            booking.staff_id,
            booking.service_id,
            booking.resource_id,
            format_dt(&booking.start),
            format_dt(&booking.end),
            booking.pickup_location,
            booking.status.as_str(),
            booking.payment_status.as_str(),
            booking.google_event_id,
            booking.group_size,
            participants,
            recurring.map(|r| r.group_id.as_str()),
            recurring.map(|r| r.kind.as_str()),
            recurring.map(|r| r.count),
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_booking(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let row = conn
        .query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
            params![id],
            |row| Ok(parse_booking_row(row)),
        )
        .optional()?;

    row.transpose()
}

pub fn get_all_bookings(conn: &Connection) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY start_at ASC, created_at ASC"
    ))?;

    let rows = stmt.query_map([], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: String = row.get(0)?;
    let start_str: String = row.get(5)?;
    let end_str: String = row.get(6)?;
    let status_str: String = row.get(8)?;
    let payment_str: String = row.get(9)?;
    let participants_json: Option<String> = row.get(12)?;
    let group_id: Option<String> = row.get(13)?;
    let recurring_type: Option<String> = row.get(14)?;
    let recurring_count: Option<i32> = row.get(15)?;

    let start = parse_dt(&start_str)?;
    let end = parse_dt(&end_str)?;
    anyhow::ensure!(start < end, "booking {id} ends before it starts");

    let status = BookingStatus::parse(&status_str)
        .with_context(|| format!("unknown booking status: {status_str}"))?;
    let payment_status = PaymentStatus::parse(&payment_str)
        .with_context(|| format!("unknown payment status: {payment_str}"))?;
    let participants = participants_json
        .map(|json| serde_json::from_str::<Vec<String>>(&json))
        .transpose()?;

    let recurring_details = match (group_id, recurring_type, recurring_count) {
        (Some(group_id), Some(kind), Some(count)) => Some(RecurringDetails {
            group_id,
            kind: RecurrenceKind::parse(&kind)
                .with_context(|| format!("unknown recurrence type: {kind}"))?,
            count,
        }),
        _ => None,
    };

    Ok(Booking {
        id,
        customer_id: row.get(1)?,
        staff_id: row.get(2)?,
        service_id: row.get(3)?,
        resource_id: row.get(4)?,
        start,
        end,
        pickup_location: row.get(7)?,
        status,
        payment_status,
        google_event_id: row.get(10)?,
        group_size: row.get(11)?,
        participants,
        recurring_details,
    })
}

// ── Blocked Periods ──

pub fn insert_blocked_period(conn: &Connection, period: &BlockedPeriod) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO blocked_periods (id, staff_id, start_at, end_at, reason) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            period.id,
            period.staff_id,
            format_dt(&period.start),
            format_dt(&period.end),
            period.reason,
        ],
    )?;
    Ok(())
}

pub fn get_blocked_periods(conn: &Connection) -> anyhow::Result<Vec<BlockedPeriod>> {
    let mut stmt = conn.prepare(
        "SELECT id, staff_id, start_at, end_at, reason FROM blocked_periods ORDER BY start_at ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut periods = vec![];
    for row in rows {
        let (id, staff_id, start_str, end_str, reason) = row?;
        periods.push(BlockedPeriod {
            id,
            staff_id,
            start: parse_dt(&start_str)?,
            end: parse_dt(&end_str)?,
            reason,
        });
    }
    Ok(periods)
}

pub fn delete_blocked_period(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM blocked_periods WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

// ── Services ──

pub fn insert_service(conn: &Connection, service: &Service) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO services (id, name, kind, duration_minutes) VALUES (?1, ?2, ?3, ?4)",
        params![
            service.id,
            service.name,
            service.kind.as_str(),
            service.duration_minutes,
        ],
    )?;
    Ok(())
}

pub fn get_services(conn: &Connection) -> anyhow::Result<Vec<Service>> {
    let mut stmt =
        conn.prepare("SELECT id, name, kind, duration_minutes FROM services ORDER BY name ASC")?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, i64>(3)?,
        ))
    })?;

    let mut services = vec![];
    for row in rows {
        let (id, name, kind_str, duration_minutes) = row?;
        let kind = ServiceKind::parse(&kind_str)
            .with_context(|| format!("unknown service kind: {kind_str}"))?;
        services.push(Service {
            id,
            name,
            kind,
            duration_minutes,
        });
    }
    Ok(services)
}

pub fn get_service_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Service>> {
    Ok(get_services(conn)?.into_iter().find(|s| s.id == id))
}
