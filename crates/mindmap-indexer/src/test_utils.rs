//! Test utilities for the scanner

use std::fs;

use tempfile::TempDir;

/// A small Next.js-style app: a hook, two components, a schema and an API route.
pub const SAMPLE_APP: &[(&str, &str)] = &[
    (
        "src/lib/format.ts",
        r#"export function formatName(first: string, last: string): string {
  return `${first} ${last}`;
}
"#,
    ),
    (
        "src/hooks/useUser.ts",
        r#"import { useState } from 'react';
import { formatName } from '../lib/format';

export function useUser(id: string) {
  const [name] = useState(formatName('Ada', 'Lovelace'));
  return { id, name };
}
"#,
    ),
    (
        "src/components/Avatar.tsx",
        r#"interface AvatarProps {
  url: string;
  size?: number;
}

export function Avatar({ url, size }: AvatarProps) {
  return <img src={url} width={size} />;
}
"#,
    ),
    (
        "src/components/Profile.tsx",
        r#"import { Avatar } from './Avatar';
import { useUser } from '@/hooks/useUser';

export default function Profile({ id }: { id: string }) {
  const user = useUser(id);
  return <div><Avatar url={user.name} /></div>;
}
"#,
    ),
    (
        "src/db/schema.ts",
        r#"import { pgTable, serial, text } from 'drizzle-orm/pg-core';

export const users = pgTable('users', {
  id: serial('id').primaryKey(),
  name: text('name'),
});

export const db = createDb();
"#,
    ),
    (
        "app/api/users/route.ts",
        r#"import { db, users } from '@/db/schema';

export async function GET() {
  const rows = await db.select().from(users);
  return Response.json(rows);
}

export async function POST(req: Request) {
  const body = await req.json();
  await db.insert(users).values(body);
  return Response.json(body);
}
"#,
    ),
    ("node_modules/react/index.js", "export function useState() {}\n"),
    ("src/types.d.ts", "declare module '*.svg';\n"),
];

/// Create a temporary repository holding [`SAMPLE_APP`]
pub fn create_test_repo() -> TempDir {
    create_repo_with_structure(SAMPLE_APP)
}

/// Create a repository with a specific file structure
pub fn create_repo_with_structure(structure: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for (path, content) in structure {
        let full_path = root.join(path);

        // Create parent directories if needed
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }

        fs::write(&full_path, content).unwrap();
    }

    temp_dir
}
